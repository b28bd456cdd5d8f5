pub mod draft;
pub mod form;
