//! Id types for terminal resources.

use crate::define_id;

// =============================================================================
// Yard layout
// =============================================================================

define_id!(YardId, "yard");
define_id!(LocationId, "loc");

// =============================================================================
// Cargo and customers
// =============================================================================

define_id!(ContainerId, "ctr");
define_id!(CompanyId, "co");

// =============================================================================
// Requests
// =============================================================================

define_id!(RequestId, "req");
