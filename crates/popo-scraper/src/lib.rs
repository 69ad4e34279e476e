//! Bulletin acquisition for the Popocatépetl bulletin service.
//!
//! [`ScrapePipeline`] walks the bulletin site through any [`BrowserDriver`];
//! [`HttpDriver`] is the bundled driver for server-rendered pages.
//!
//! [`BrowserDriver`]: popo_core::ports::BrowserDriver

pub mod config;
pub mod http_driver;
pub mod pipeline;
pub mod template;

pub use config::{ScrapeConfig, SiteLocators};
pub use http_driver::{HttpDriver, HttpSession};
pub use pipeline::{ReportTexts, ScrapePipeline, assemble_record};
