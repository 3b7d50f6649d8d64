/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::ListingStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("InvalidRequest: {0}")]
    InvalidRequest(String),
    #[error("InternalError: {0}")]
    InternalError(String),
    #[error("ConnectionError: {0}")]
    ConnectionError(String),
    #[error("ListingNotFound: {0}")]
    ListingNotFound(i64),
    #[error("InvalidTransition: listing {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: i64,
        from: ListingStatus,
        to: ListingStatus,
    },
}
