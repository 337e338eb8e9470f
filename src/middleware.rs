pub mod area;
pub mod i18n;
