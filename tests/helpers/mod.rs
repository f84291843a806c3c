pub mod builders;

pub use builders::{MemberBuilder, PolicyDir, SiteBuilder};
