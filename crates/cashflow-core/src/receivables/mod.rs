pub mod aging;
pub mod kpis;
pub mod offers;
