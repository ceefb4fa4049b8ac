pub use self::app_config::AppConfig;

mod app_config;
