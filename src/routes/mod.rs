pub(crate) mod charts;
pub(crate) mod dashboard;
pub(crate) mod health;
pub(crate) mod session;
pub(crate) mod universe;
