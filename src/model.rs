//! Typed row shapes shared between a case's CSV reader, encoder, decoder,
//! and index builder.

/// One bar of OHLCV data for Case-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub d_days: i64,
    pub open: i64,
    pub high: i64,
    pub low: i64,
    pub close: i64,
    pub volume: i64,
}

impl Bar {
    pub const ZERO: Bar = Bar {
        d_days: 0,
        open: 0,
        high: 0,
        low: 0,
        close: 0,
        volume: 0,
    };

    pub fn as_tuple(&self) -> [i64; 6] {
        [
            self.d_days,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        ]
    }

    pub fn from_tuple(t: [i64; 6]) -> Self {
        Bar {
            d_days: t[0],
            open: t[1],
            high: t[2],
            low: t[3],
            close: t[4],
            volume: t[5],
        }
    }
}

/// One reading of the UCI Air Quality dataset for Case-02.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirTick {
    pub t_min: i64,
    pub co_x10: i64,
    pub c6h6_x10: i64,
    pub nox: i64,
    pub no2: i64,
    pub t_x10: i64,
    pub rh_x10: i64,
    pub ah_x1000: i64,
}

impl AirTick {
    pub const ZERO: AirTick = AirTick {
        t_min: 0,
        co_x10: 0,
        c6h6_x10: 0,
        nox: 0,
        no2: 0,
        t_x10: 0,
        rh_x10: 0,
        ah_x1000: 0,
    };

    pub fn as_tuple(&self) -> [i64; 8] {
        [
            self.t_min,
            self.co_x10,
            self.c6h6_x10,
            self.nox,
            self.no2,
            self.t_x10,
            self.rh_x10,
            self.ah_x1000,
        ]
    }

    pub fn from_tuple(t: [i64; 8]) -> Self {
        AirTick {
            t_min: t[0],
            co_x10: t[1],
            c6h6_x10: t[2],
            nox: t[3],
            no2: t[4],
            t_x10: t[5],
            rh_x10: t[6],
            ah_x1000: t[7],
        }
    }
}

/// One row of the crypto transaction ledger for Case-04, already split into
/// its dictionary-coded and literal-string fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoTx {
    pub transaction_id: String,
    pub sender_address: String,
    pub receiver_address: String,
    pub amount: String,
    pub transaction_fee: String,
    pub timestamp: String,
    pub block_id: String,
    pub mining_pool: String,
    pub currency: String,
    pub transaction_type: String,
    pub transaction_status: String,
    pub gas_price_gwei: String,
}

pub const CRYPTO_REQUIRED_COLUMNS: [&str; 12] = [
    "Transaction_ID",
    "Sender_Address",
    "Receiver_Address",
    "Amount",
    "Transaction_Fee",
    "Timestamp",
    "Block_ID",
    "Mining_Pool",
    "Currency",
    "Transaction_Type",
    "Transaction_Status",
    "Gas_Price_Gwei",
];

pub const CRYPTO_DICT_COLUMNS: [&str; 4] =
    ["Mining_Pool", "Currency", "Transaction_Type", "Transaction_Status"];
