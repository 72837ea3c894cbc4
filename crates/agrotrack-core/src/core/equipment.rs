// crates/agrotrack-core/src/core/equipment.rs
// ============================================================================
// Module: AgroTrack Equipment Types
// Description: Minimal equipment record for the second entity family.
// Purpose: Exercise the cache layer against more than one collection.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Equipment carries only the fields needed to drive the cache and
//! pagination layers as a second entity family. The full business field
//! set lives outside this core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EquipmentId;

// ============================================================================
// SECTION: Equipment Records
// ============================================================================

/// Equipment inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    /// Store-assigned identifier.
    pub id: EquipmentId,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Model designation.
    pub model: String,
    /// Serial number; unique across the inventory.
    pub serial_number: String,
    /// Equipment type name.
    pub type_name: String,
}
