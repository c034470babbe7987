// Page objects for the storefront under test

pub mod cafe;
pub mod product_list;

pub use cafe::CafePage;
pub use product_list::ProductListPage;
