pub mod pagination_controls;
pub mod stepper;
pub mod ui;

pub use pagination_controls::PaginationControls;
pub use stepper::FormStepper;
