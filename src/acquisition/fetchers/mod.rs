mod page_scriber;
mod request;

pub use page_scriber::PageScriber;
pub use request::RequestFetcher;
