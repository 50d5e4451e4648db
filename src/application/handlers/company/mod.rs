//! Company account handlers.

mod find_company_by_email;
mod get_company;
mod register_company;

pub use find_company_by_email::{FindCompanyByEmailHandler, FindCompanyByEmailQuery};
pub use get_company::{GetCompanyHandler, GetCompanyQuery};
pub use register_company::{
    RegisterCompanyCommand, RegisterCompanyHandler, RegisterCompanyResult,
};
