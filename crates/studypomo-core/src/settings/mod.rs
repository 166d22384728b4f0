mod gateway;
mod model;
mod store;

pub use gateway::{HttpSettingsGateway, SettingsGateway};
pub use model::{
    Settings, LONG_BREAK_MINUTES_RANGE, SHORT_BREAK_MINUTES_RANGE, STUDY_MINUTES_RANGE,
};
pub use store::SettingsStore;
