use std::sync::Arc;

use tgrelay_relay::{Dispatcher, RelayStore};

/// Runtime state shared by the polling loop and the update handlers.
pub struct RelayBot {
    pub bot: teloxide::Bot,
    /// Username reported by `getMe`, used to match `/cmd@name` suffixes.
    pub bot_username: Option<String>,
    pub store: Arc<RelayStore>,
    pub dispatcher: Dispatcher,
}

impl RelayBot {
    pub fn new(
        bot: teloxide::Bot,
        bot_username: Option<String>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            bot,
            bot_username,
            store: Arc::clone(dispatcher.store()),
            dispatcher,
        }
    }
}
