// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace product catalog.
//!
//! The catalog is static: products are defined here and priced in
//! earned tokens. Orders reference products by ID.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A marketplace product.
#[derive(Debug, Clone, Copy, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Category ID (see [`CATEGORIES`])
    pub category: &'static str,
    /// Price in earned tokens
    pub token_price: u64,
    /// Retail price for display
    pub original_price: &'static str,
    pub discount: &'static str,
    /// Display emoji
    pub image: &'static str,
    pub in_stock: bool,
    pub rating: f64,
    pub reviews: u32,
    pub specifications: [&'static str; 3],
}

/// A product category for filtering.
#[derive(Debug, Clone, Copy, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const CATEGORIES: [Category; 6] = [
    Category { id: "all", name: "All Products", icon: "🛍️" },
    Category { id: "solar_equipment", name: "Solar Equipment", icon: "☀️" },
    Category { id: "eco_products", name: "Eco Products", icon: "🌿" },
    Category { id: "gift_cards", name: "Gift Cards", icon: "🎁" },
    Category { id: "certificates", name: "Certificates", icon: "📜" },
    Category { id: "app_features", name: "Premium Features", icon: "⭐" },
];

pub const PRODUCT_CATALOG: [Product; 8] = [
    Product {
        id: "solar_panel_100w",
        name: "100W Solar Panel",
        description: "High-efficiency monocrystalline solar panel perfect for home installations",
        category: "solar_equipment",
        token_price: 2500,
        original_price: "$149.99",
        discount: "15% off",
        image: "🔆",
        in_stock: true,
        rating: 4.8,
        reviews: 234,
        specifications: ["100W Output", "Monocrystalline", "25-year warranty"],
    },
    Product {
        id: "smart_inverter",
        name: "Smart Grid-Tie Inverter",
        description: "Intelligent inverter with WiFi monitoring and grid synchronization",
        category: "solar_equipment",
        token_price: 4200,
        original_price: "$299.99",
        discount: "20% off",
        image: "⚡",
        in_stock: true,
        rating: 4.9,
        reviews: 156,
        specifications: ["3000W Capacity", "WiFi Enabled", "Grid-tie Compatible"],
    },
    Product {
        id: "battery_pack",
        name: "Lithium Battery Pack",
        description: "12V 100Ah LiFePO4 battery for energy storage systems",
        category: "solar_equipment",
        token_price: 6000,
        original_price: "$399.99",
        discount: "25% off",
        image: "🔋",
        in_stock: true,
        rating: 4.7,
        reviews: 189,
        specifications: ["100Ah Capacity", "LiFePO4 Technology", "10-year lifespan"],
    },
    Product {
        id: "led_bulb_pack",
        name: "Smart LED Bulb Pack (4x)",
        description: "Energy-efficient smart LED bulbs with app control",
        category: "eco_products",
        token_price: 800,
        original_price: "$59.99",
        discount: "10% off",
        image: "💡",
        in_stock: true,
        rating: 4.6,
        reviews: 445,
        specifications: ["9W LED", "Smart Control", "Color Changing"],
    },
    Product {
        id: "smart_thermostat",
        name: "Eco Smart Thermostat",
        description: "AI-powered thermostat that learns your preferences and saves energy",
        category: "eco_products",
        token_price: 1500,
        original_price: "$129.99",
        discount: "12% off",
        image: "🌡️",
        in_stock: true,
        rating: 4.8,
        reviews: 312,
        specifications: ["AI Learning", "WiFi Enabled", "Energy Savings"],
    },
    Product {
        id: "carbon_offset_1ton",
        name: "Carbon Offset Certificate (1 Ton)",
        description: "Verified carbon offset certificate supporting renewable energy projects",
        category: "certificates",
        token_price: 500,
        original_price: "$25.00",
        discount: "0% off",
        image: "🌱",
        in_stock: true,
        rating: 5.0,
        reviews: 89,
        specifications: ["1 Ton CO2 Offset", "Verified Project", "Digital Certificate"],
    },
    Product {
        id: "amazon_gift_50",
        name: "$50 Amazon Gift Card",
        description: "Digital Amazon gift card delivered instantly to your email",
        category: "gift_cards",
        token_price: 2000,
        original_price: "$50.00",
        discount: "0% off",
        image: "🎁",
        in_stock: true,
        rating: 5.0,
        reviews: 1234,
        specifications: ["Digital Delivery", "Instant", "No Expiration"],
    },
    Product {
        id: "premium_features",
        name: "Premium App Features (1 Year)",
        description: "Unlock advanced analytics, custom reports, and priority support",
        category: "app_features",
        token_price: 1200,
        original_price: "$99.99",
        discount: "30% off",
        image: "⭐",
        in_stock: true,
        rating: 4.9,
        reviews: 567,
        specifications: ["Advanced Analytics", "Custom Reports", "Priority Support"],
    },
];

/// Look up a catalog product by ID.
pub fn product_by_id(id: &str) -> Option<&'static Product> {
    PRODUCT_CATALOG.iter().find(|p| p.id == id)
}
