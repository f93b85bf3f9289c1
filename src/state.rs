use std::sync::Arc;

use crate::config::Args;
use crate::gateway::{Gateway, GatewaySettings};
use crate::generation::TextGenerator;
use crate::records::{MembershipRecords, PowerplayRecords, UserRecords};
use crate::store::KeyValueStore;

// app's shared state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub users: UserRecords,
    pub memberships: MembershipRecords,
    pub powerplays: PowerplayRecords,
}

// Table names for every record kind
#[derive(Debug, Clone)]
pub struct Tables {
    pub gpt: String,
    pub contacts: String,
    pub memberships: String,
    pub powerplays: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            gpt: "GPT_Transactions".to_string(),
            contacts: "User".to_string(),
            memberships: "Memberships".to_string(),
            powerplays: "Powerplays".to_string(),
        }
    }
}

impl From<&Args> for Tables {
    fn from(args: &Args) -> Self {
        Self {
            gpt: args.gpt_table.clone(),
            contacts: args.contacts_table.clone(),
            memberships: args.membership_table.clone(),
            powerplays: args.powerplay_table.clone(),
        }
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn TextGenerator>,
        tables: Tables,
        default_model: String,
        purge_secret: Option<String>,
    ) -> Self {
        let settings = GatewaySettings {
            table: tables.gpt,
            default_model,
            purge_secret,
        };

        Self {
            gateway: Gateway::new(store.clone(), generator, settings),
            users: UserRecords::new(store.clone(), tables.contacts),
            memberships: MembershipRecords::new(store.clone(), tables.memberships),
            powerplays: PowerplayRecords::new(store, tables.powerplays),
        }
    }
}
