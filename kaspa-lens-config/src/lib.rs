mod app_context;
mod prefs;
mod setting;

pub use app_context::AppContext;
pub use prefs::{Prefs, PrefsStore};
pub use setting::{
    MarketSetting, ServerSetting, Setting, TelemetrySetting, UpstreamSetting, WalletSetting,
};
