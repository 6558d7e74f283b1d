pub mod asset;
pub mod bar;
pub mod bar_series;
pub mod clock;
pub mod request_params;
pub mod timeframe;
