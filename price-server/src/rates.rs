use std::str::FromStr;

use log::{info, warn};
use price_core::{ExchangeRates, RateError, RateSource};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Ответ НБ РБ `/exrates/rates/{CUR}?parammode=2` (лишние поля игнорируем)
#[derive(Debug, Deserialize)]
struct NbrbRate {
    #[serde(rename = "Cur_OfficialRate")]
    official_rate: Option<serde_json::Number>,
    #[serde(rename = "Cur_Scale")]
    scale: Option<u32>,
}

/// Котировка одной валюты: `rate` BYN за `scale` единиц
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quote {
    rate: Decimal,
    scale: Option<u32>,
}

/// Курсы USD и RUB от НБ РБ.
///
/// Одна попытка без ретраев; любой сбой (сеть, статус, формат) по любой из
/// двух валют даёт резервную пару курсов.
pub(crate) struct NbrbRateSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NbrbRateSource {
    pub(crate) fn new(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn try_fetch(&self) -> Result<ExchangeRates, RateError> {
        let usd = self.fetch_quote("USD")?;
        let rub = self.fetch_quote("RUB")?;

        // USD НБ РБ котирует за 1 единицу, но если поле есть, учитываем его
        let usd_scale = usd.scale.unwrap_or(1);
        let rub_scale = rub.scale.ok_or(RateError::MissingField("Cur_Scale"))?;
        ExchangeRates::from_official(usd.rate, usd_scale, rub.rate, rub_scale)
    }

    fn fetch_quote(&self, currency: &str) -> Result<Quote, RateError> {
        let url = format!("{}/{currency}?parammode=2", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RateError::Unavailable(format!("{currency}: {e}")))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(RateError::Unavailable(format!("{currency}: HTTP {status}")));
        }

        let body = resp
            .text()
            .map_err(|e| RateError::Unavailable(format!("{currency}: {e}")))?;

        parse_quote(&body)
    }
}

impl RateSource for NbrbRateSource {
    fn fetch_rates(&self) -> ExchangeRates {
        match self.try_fetch() {
            Ok(rates) => {
                info!("NBRB rates: {rates}");
                rates
            }
            Err(e) => {
                let rates = ExchangeRates::fallback();
                warn!("NBRB rates unavailable ({e}); using fallback {rates}");
                rates
            }
        }
    }
}

fn parse_quote(body: &str) -> Result<Quote, RateError> {
    let raw: NbrbRate = serde_json::from_str(body).map_err(|e| RateError::Malformed {
        field: "body",
        value: e.to_string(),
    })?;

    let number = raw
        .official_rate
        .ok_or(RateError::MissingField("Cur_OfficialRate"))?;

    let text = number.to_string();
    let rate = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| RateError::Malformed {
            field: "Cur_OfficialRate",
            value: text.clone(),
        })?;

    Ok(Quote {
        rate,
        scale: raw.scale,
    })
}
