pub mod delete_confirmation;
pub mod event_form;
pub mod help;
