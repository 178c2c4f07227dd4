// Adapters: concrete implementations of the domain ports (files, postal data, SOAP).

pub mod postal;
pub mod soap;
pub mod spreadsheet;
pub mod storage;
