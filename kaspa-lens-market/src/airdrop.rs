use kaspa_lens_base::{Sompi, Ticker};
use kaspa_lens_client::{ClientError, KasplexClient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirdropError {
    #[error("invalid amount {amount:?} for {address}")]
    InvalidAmount { address: String, amount: String },

    #[error("airdrop has no recipients")]
    Empty,

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AirdropEntry {
    pub address: String,
    pub amount: Decimal,
}

impl AirdropError {
    fn invalid(entry: &AirdropEntry) -> Self {
        AirdropError::InvalidAmount {
            address: entry.address.clone(),
            amount: entry.amount.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AirdropOutcome {
    Sufficient { balance: Decimal, required: Decimal },
    Insufficient { balance: Decimal, required: Decimal },
    NoBalance,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AirdropPlan {
    pub ticker: Ticker,
    pub entries: Vec<AirdropEntry>,
    total: Decimal,
}

impl AirdropPlan {
    pub fn new(ticker: impl Into<Ticker>, entries: Vec<AirdropEntry>) -> Result<Self, AirdropError> {
        if entries.is_empty() {
            return Err(AirdropError::Empty);
        }

        let ticker = ticker.into();
        let mut total = Decimal::ZERO;

        for entry in &entries {
            let valid = !entry.amount.is_sign_negative()
                && (!ticker.is_kas() || Sompi::from_kas(entry.amount).is_some());

            total = match total.checked_add(entry.amount) {
                Some(total) if valid => total,
                _ => return Err(AirdropError::invalid(entry)),
            };
        }

        Ok(AirdropPlan {
            ticker,
            entries,
            total,
        })
    }

    /// `address,amount` 格式，第一行为表头，空行忽略
    pub fn from_csv(ticker: impl Into<Ticker>, text: &str) -> Result<Self, AirdropError> {
        let entries = text
            .lines()
            .filter(|row| !row.trim().is_empty())
            .skip(1)
            .map(|row| {
                let mut cells = row.split(',').map(str::trim);
                let address = cells.next().unwrap_or_default().to_string();
                let amount = cells.next().unwrap_or_default();

                Decimal::from_str(amount)
                    .map(|amount| AirdropEntry {
                        address: address.clone(),
                        amount,
                    })
                    .map_err(|_| AirdropError::InvalidAmount {
                        address,
                        amount: amount.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ticker, entries)
    }

    pub fn is_kas(&self) -> bool {
        self.ticker.is_kas()
    }

    pub fn total_required(&self) -> Decimal {
        self.total
    }

    // KAS 转账金额按 sompi 向下取整
    pub fn kas_transfers(&self) -> Vec<(String, Sompi)> {
        self.entries
            .iter()
            .filter_map(|e| Sompi::from_kas(e.amount).map(|s| (e.address.clone(), s)))
            .collect()
    }

    pub fn evaluate(&self, balance: Option<Decimal>) -> AirdropOutcome {
        let required = self.total_required();

        match balance {
            None => AirdropOutcome::NoBalance,
            Some(balance) if balance < required => AirdropOutcome::Insufficient { balance, required },
            Some(balance) => AirdropOutcome::Sufficient { balance, required },
        }
    }

    pub async fn check_balance(
        &self,
        address: &str,
        kas_balance: Sompi,
        kasplex: &KasplexClient,
    ) -> Result<AirdropOutcome, AirdropError> {
        let balance = if self.is_kas() {
            Some(kas_balance.to_kas())
        } else {
            kasplex.token_balance(address, self.ticker.as_ref()).await?
        };

        let outcome = self.evaluate(balance);
        tracing::debug!(ticker = %self.ticker, ?outcome, "airdrop balance checked");

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CSV: &str = "address,amount\nkaspa:address1,100\n\nkaspa:address2, 200.5\n";

    #[test]
    fn test_from_csv() -> anyhow::Result<()> {
        let plan = AirdropPlan::from_csv("NACHO", CSV)?;
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[1].address, "kaspa:address2");
        assert_eq!(plan.total_required(), dec!(300.5));
        Ok(())
    }

    #[test]
    fn test_from_csv_rejects_bad_amount() {
        let result = AirdropPlan::from_csv("NACHO", "address,amount\nkaspa:a,ten\n");
        assert!(matches!(result, Err(AirdropError::InvalidAmount { .. })));

        let result = AirdropPlan::from_csv("NACHO", "address,amount\n");
        assert!(matches!(result, Err(AirdropError::Empty)));
    }

    #[test]
    fn test_overflowing_amounts_rejected() {
        let csv = format!("address,amount\nkaspa:a,{}\nkaspa:b,1\n", Decimal::MAX);
        let result = AirdropPlan::from_csv("NACHO", &csv);
        assert!(matches!(
            result,
            Err(AirdropError::InvalidAmount { ref address, .. }) if address == "kaspa:b"
        ));

        // 超出 u64 sompi 范围的 KAS 金额
        let result = AirdropPlan::from_csv("KAS", "address,amount\nkaspa:a,200000000000\n");
        assert!(matches!(result, Err(AirdropError::InvalidAmount { .. })));
    }

    #[test]
    fn test_evaluate() -> anyhow::Result<()> {
        let plan = AirdropPlan::from_csv("kas", CSV)?;
        assert!(plan.is_kas());

        assert_eq!(plan.evaluate(None), AirdropOutcome::NoBalance);
        assert_eq!(
            plan.evaluate(Some(dec!(300))),
            AirdropOutcome::Insufficient {
                balance: dec!(300),
                required: dec!(300.5)
            }
        );
        assert!(matches!(
            plan.evaluate(Some(dec!(300.5))),
            AirdropOutcome::Sufficient { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_kas_transfers() -> anyhow::Result<()> {
        let plan = AirdropPlan::from_csv("KAS", "address,amount\nkaspa:a,0.123456789\n")?;
        assert_eq!(
            plan.kas_transfers(),
            vec![("kaspa:a".to_string(), Sompi::new(12_345_678))]
        );
        Ok(())
    }
}
