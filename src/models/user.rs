//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Wallet address (lowercase, also used as document ID)
    pub wallet: String,
    /// When the wallet first connected
    pub created_at: String,
    /// Last connection timestamp
    pub last_active: String,
}
