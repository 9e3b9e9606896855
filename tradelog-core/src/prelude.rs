pub use crate::models::{
    currency_amount::CurrencyAmount,
    order::Order,
    order_type::OrderType,
    trade::Trade,
    OrderUid, TradeUid,
};
