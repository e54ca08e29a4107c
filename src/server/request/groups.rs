//! Consumer group-related request parsing.

use nom::IResult;
use nombytes::NomBytes;

use crate::parser::{bytes_to_string, parse_string};

/// GroupCoordinator request data.
#[derive(Debug, Clone)]
pub struct GroupCoordinatorRequestData {
    pub group_id: String,
}

pub fn parse_group_coordinator_request(
    s: NomBytes,
    _version: i16,
) -> IResult<NomBytes, GroupCoordinatorRequestData> {
    let (s, group_id) = parse_string(s)?;

    Ok((
        s,
        GroupCoordinatorRequestData {
            group_id: bytes_to_string(&group_id)?,
        },
    ))
}
