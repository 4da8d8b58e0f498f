//! Parsers for the two text formats stored in a diagram folder.
//!
//! - **Parts tables** ([`table`]): CSV with a mandatory header row. Column
//!   roles are inferred from header text, not position.
//! - **Coordinate manifests** ([`manifest`]): JSON validated structurally, in
//!   lenient or strict mode.
//!
//! ## Recognized table headers
//!
//! Matching is case-insensitive on trimmed header text.
//!
//! | Field | Headers |
//! |-------|---------|
//! | number | `Number`, `S.No.`, `SNo`, `No.`, any header containing "number" but not "part" |
//! | part number | anything matching `part\s*no` (e.g. `Part No.`) |
//! | description | any header containing "description" |
//! | name | `Qty`/`Quantity`, falling back to an exact `Name` |
//!
//! ## Example
//!
//! ```rust
//! use diagram_catalog::parsing::table::parse_table;
//!
//! let rows = parse_table("Number,Part No.,Description,Qty\n1,P1,Oil Pump,2\n");
//! assert_eq!(rows[0].part_number, "P1");
//! assert_eq!(rows[0].name, "2");
//! ```

pub mod manifest;
pub mod table;
