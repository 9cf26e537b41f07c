pub mod emitter;
pub mod expander;
pub mod extractor;
pub mod runner;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{CompanyRecord, QueryResult, RunReport, SalaryRecord, SearchQuery};
pub use crate::domain::ports::{BrowserContext, BrowserLauncher, DomNode, PageScope, QuerySource, TabularWriter};
pub use crate::utils::error::Result;
