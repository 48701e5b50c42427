pub mod dataset;
pub mod decision;
pub mod eval;
pub mod features;
pub mod form;
pub mod model;
pub mod models;
pub mod report;
