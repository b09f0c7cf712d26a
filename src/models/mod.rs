pub mod quote_model;
pub mod settings_model;
pub mod track_model;
