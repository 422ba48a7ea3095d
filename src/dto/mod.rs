pub mod report_dtos;

pub use report_dtos::{ ReportCreation, ReportListParams };
