use diesel::{sql_types::BigInt, AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};

pub mod currency_amount;
pub mod order;
pub mod order_type;
pub mod trade;

/// Declares a storage-assigned surrogate key stored as `BIGINT`
macro_rules! surrogate_key {
    ($($(#[$meta:meta])* $key:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug,
                Serialize,
                Deserialize,
                Eq,
                PartialEq,
                PartialOrd,
                Ord,
                Clone,
                Copy,
                Hash,
                FromSqlRow,
                AsExpression,
            )]
            #[diesel(sql_type = BigInt)]
            pub struct $key(i64);

            impl From<i64> for $key {
                fn from(value: i64) -> Self {
                    $key(value)
                }
            }

            impl From<$key> for i64 {
                fn from(value: $key) -> Self {
                    value.0
                }
            }

            impl std::fmt::Display for $key {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl<DB> diesel::serialize::ToSql<BigInt, DB> for $key
            where
                DB: diesel::backend::Backend,
                i64: diesel::serialize::ToSql<BigInt, DB>,
            {
                fn to_sql<'b>(
                    &'b self,
                    out: &mut diesel::serialize::Output<'b, '_, DB>,
                ) -> diesel::serialize::Result {
                    <i64 as diesel::serialize::ToSql<BigInt, DB>>::to_sql(&self.0, out)
                }
            }

            impl<DB> diesel::deserialize::FromSql<BigInt, DB> for $key
            where
                DB: diesel::backend::Backend,
                i64: diesel::deserialize::FromSql<BigInt, DB>,
            {
                fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
                    Ok($key(<i64 as diesel::deserialize::FromSql<BigInt, DB>>::from_sql(bytes)?))
                }
            }
        )*
    };
}

surrogate_key!(
    /// Technical identifier of a row of the `trades` table
    TradeUid,
    /// Technical identifier of a row of the `orders` table
    OrderUid,
);
