//! `SeaORM` active enums mapped to the Postgres enum types.
//!
//! Each enum converts to and from its counterpart in `daftar-core`.

use daftar_core::{
    ledger, taxonomy,
    treasury::{self, InstrumentType as CoreInstrumentType},
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "code_kind")]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    #[sea_orm(string_value = "group")]
    Group,
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "specific")]
    Specific,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "code_nature")]
#[serde(rename_all = "lowercase")]
pub enum CodeNature {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "detail_kind")]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    #[sea_orm(string_value = "user_managed")]
    UserManaged,
    #[sea_orm(string_value = "system_managed")]
    SystemManaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "temporary")]
    Temporary,
    #[sea_orm(string_value = "permanent")]
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_status")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "temporary")]
    Temporary,
    #[sea_orm(string_value = "sent")]
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "instrument_type")]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "check")]
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "check_type")]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    #[sea_orm(string_value = "incoming")]
    Incoming,
    #[sea_orm(string_value = "outgoing")]
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "check_status")]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "issued")]
    Issued,
    #[sea_orm(string_value = "incashbox")]
    #[serde(rename = "incashbox")]
    InCashbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "checkbook_status")]
#[serde(rename_all = "lowercase")]
pub enum CheckbookStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "exhausted")]
    Exhausted,
}

macro_rules! mirror_enum {
    ($db:ty, $core:ty, { $($variant:ident),+ $(,)? }) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                type Src = $core;
                match value {
                    $(Src::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                type Src = $db;
                match value {
                    $(Src::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(CodeKind, taxonomy::CodeKind, { Group, General, Specific });
mirror_enum!(CodeNature, taxonomy::Nature, { Debit, Credit });
mirror_enum!(DetailKind, taxonomy::DetailKind, { UserManaged, SystemManaged });
mirror_enum!(JournalStatus, ledger::JournalStatus, { Draft, Temporary, Permanent });
mirror_enum!(InstrumentType, CoreInstrumentType, { Cash, Card, Transfer, Check });
mirror_enum!(CheckType, treasury::CheckType, { Incoming, Outgoing });
mirror_enum!(CheckStatus, treasury::CheckStatus, { Created, Issued, InCashbox });
mirror_enum!(CheckbookStatus, treasury::CheckbookStatus, { Active, Exhausted });
