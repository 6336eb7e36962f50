use folio_core_contact_impl::ContactFeatureServiceImpl;
use folio_extern_impl::{analytics::AnalyticsServiceImpl, contact_api::ContactApiServiceImpl};

// Extern
pub type ContactApi = ContactApiServiceImpl;
pub type Analytics = AnalyticsServiceImpl;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<ContactApi, Analytics>;
