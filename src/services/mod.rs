pub mod pagination;
pub mod report_service;

pub use pagination::{ Pageable, PageRequest };
pub use report_service::{ ReportService, DISPATCH_BATCH };
