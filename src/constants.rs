//! Centralized protocol and configuration constants.
//!
//! This module consolidates the magic numbers used throughout the mock
//! broker. Having them in one place makes it easier to:
//!
//! - Understand the protocol constraints
//! - Update values consistently
//! - Document the rationale for each constant

// =============================================================================
// Broker Constants
// =============================================================================

/// Node id of the single broker this server pretends to be.
///
/// Every Metadata and GroupCoordinator response names this node as leader,
/// replica, isr member and coordinator.
pub const NODE_ID: i32 = 100;

// =============================================================================
// Protocol Constants (Kafka Wire Protocol)
// =============================================================================

/// Sentinel `time` value in an Offset request asking for the latest offset.
pub const OFFSET_LATEST: i64 = -1;

/// Sentinel `time` value in an Offset request asking for the earliest offset.
pub const OFFSET_EARLIEST: i64 = -2;

/// Size of the v0 message header that the CRC does not cover:
/// crc (4 bytes) itself; the checksum runs from the magic byte to the end.
pub const MESSAGE_CRC_SKIP: usize = 4;

/// Fixed overhead of a v0 message set entry before the key/value fields:
/// offset (8) + message size (4) + crc (4) + magic (1) + attributes (1).
pub const MESSAGE_SET_ENTRY_OVERHEAD: usize = 18;

/// Maximum allowed array size in Kafka protocol parsing.
///
/// This prevents memory exhaustion from malformed messages that claim
/// to have billions of elements. 100,000 is generous but bounded.
pub const MAX_PROTOCOL_ARRAY_SIZE: i32 = 100_000;

// =============================================================================
// Network Constants
// =============================================================================

/// Maximum size of a single request frame (100 MB).
///
/// Prevents memory exhaustion from malicious or malformed size prefixes.
///
/// Note: This should match Kafka's `message.max.bytes` default.
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

// =============================================================================
// Tests
// =============================================================================
