//! Company-side promo handlers.

mod create_promo;
mod edit_promo;
mod get_company_promo;
mod get_promo_stats;
mod list_company_promos;

pub use create_promo::{CreatePromoCommand, CreatePromoHandler, CreatePromoResult};
pub use edit_promo::{EditPromoCommand, EditPromoHandler, EditPromoResult};
pub use get_company_promo::{GetCompanyPromoHandler, GetCompanyPromoQuery};
pub use get_promo_stats::{GetPromoStatsHandler, GetPromoStatsQuery};
pub use list_company_promos::{ListCompanyPromosHandler, ListCompanyPromosQuery};
