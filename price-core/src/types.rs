use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{FALLBACK_BYN_PER_RUB, FALLBACK_BYN_PER_USD, PRICE_DECIMALS};
use crate::error::RateError;
use crate::search::SearchIndex;

/// Одна позиция прайса
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub code: String,
    pub name: String,
    /// Цена из прайса, RUB
    pub price_rub: Decimal,
    /// `name`, переведённое в кириллицу
    pub name_cyrillic: String,
    /// `name`, переведённое из кириллицы в латиницу
    pub name_latin: String,
    pub price_byn: Decimal,
    pub price_usd: Decimal,
}

/// Откуда взяты курсы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Live,
    Fallback,
}

/// Курсы НБ РБ в BYN.
///
/// Оба курса строго положительные: конструктор не даёт собрать другое,
/// поэтому деление на курс при пересчёте цен безопасно.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRates {
    byn_per_usd: Decimal,
    byn_per_rub: Decimal,
    origin: RateOrigin,
}

impl ExchangeRates {
    /// Курсы за 1 единицу валюты; ноль и отрицательные отвергаются
    pub fn new(byn_per_usd: Decimal, byn_per_rub: Decimal) -> Result<Self, RateError> {
        for rate in [byn_per_usd, byn_per_rub] {
            if rate <= Decimal::ZERO {
                return Err(RateError::NonPositive(rate));
            }
        }
        Ok(Self {
            byn_per_usd,
            byn_per_rub,
            origin: RateOrigin::Live,
        })
    }

    /// Курсы в том виде, как их отдаёт НБ РБ: `rate` BYN за `scale` единиц валюты
    pub fn from_official(
        usd_rate: Decimal,
        usd_scale: u32,
        rub_rate: Decimal,
        rub_scale: u32,
    ) -> Result<Self, RateError> {
        Self::new(per_unit(usd_rate, usd_scale)?, per_unit(rub_rate, rub_scale)?)
    }

    /// Резервная пара на случай недоступности НБ РБ
    pub fn fallback() -> Self {
        Self {
            byn_per_usd: FALLBACK_BYN_PER_USD,
            byn_per_rub: FALLBACK_BYN_PER_RUB,
            origin: RateOrigin::Fallback,
        }
    }

    /// BYN за 1 USD
    pub fn byn_per_usd(&self) -> Decimal {
        self.byn_per_usd
    }

    /// BYN за 1 RUB
    pub fn byn_per_rub(&self) -> Decimal {
        self.byn_per_rub
    }

    /// Живые это курсы или резервные
    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    /// Кросс-курс: сколько RUB за 1 USD
    pub fn rub_per_usd(&self) -> Decimal {
        self.byn_per_usd / self.byn_per_rub
    }

    /// RUB -> BYN -> USD, округление до копеек на каждом шаге отдельно
    pub fn convert(&self, price_rub: Decimal) -> (Decimal, Decimal) {
        let byn = round_price(price_rub * self.byn_per_rub);
        let usd = round_price(byn / self.byn_per_usd);
        (byn, usd)
    }
}

impl fmt::Display for ExchangeRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1 USD = {} BYN, 1 RUB = {} BYN ({:?})",
            self.byn_per_usd, self.byn_per_rub, self.origin
        )
    }
}

fn per_unit(rate: Decimal, scale: u32) -> Result<Decimal, RateError> {
    if scale == 0 {
        return Err(RateError::BadScale(scale));
    }
    Ok(rate / Decimal::from(scale))
}

fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Источник курсов для пересчёта цен
pub trait RateSource {
    /// Всегда возвращает курсы: при сбое источника — резервные
    fn fetch_rates(&self) -> ExchangeRates;
}

/// Неизменяемый срез прайса вместе с курсами, по которым он пересчитан
#[derive(Debug)]
pub struct CatalogSnapshot {
    rows: Vec<CatalogRow>,
    rates: ExchangeRates,
    built_at: DateTime<Utc>,
    index: SearchIndex,
}

impl CatalogSnapshot {
    /// Строит срез и поисковый индекс к нему
    pub fn new(rows: Vec<CatalogRow>, rates: ExchangeRates, built_at: DateTime<Utc>) -> Self {
        let index = SearchIndex::build(&rows);
        Self {
            rows,
            rates,
            built_at,
            index,
        }
    }

    /// Позиции в порядке прайса
    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    /// Курсы, по которым пересчитаны цены
    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// Когда срез собран
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub(crate) fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Число позиций
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Пустой ли прайс
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn from_official_divides_usd_by_its_scale_too() {
        let rates = ExchangeRates::from_official(dec!(32), 10, dec!(3.5), 100).unwrap();
        assert_eq!(rates.byn_per_usd(), dec!(3.2));
        assert_eq!(rates.convert(dec!(1000)), (dec!(35.00), dec!(10.94)));

        assert!(matches!(
            ExchangeRates::from_official(dec!(3.2), 0, dec!(3.5), 100),
            Err(RateError::BadScale(0))
        ));
    }

    #[test]
    fn from_official_divides_by_scale() {
        let rates = ExchangeRates::from_official(dec!(3.2), 1, dec!(3.5), 100).unwrap();
        assert_eq!(rates.byn_per_usd(), dec!(3.2));
        assert_eq!(rates.byn_per_rub(), dec!(0.035));
        assert_eq!(rates.origin(), RateOrigin::Live);
    }

    #[test]
    fn new_rejects_non_positive_rates() {
        assert!(matches!(
            ExchangeRates::new(dec!(0), dec!(0.035)),
            Err(RateError::NonPositive(_))
        ));
        assert!(matches!(
            ExchangeRates::new(dec!(3.2), dec!(-1)),
            Err(RateError::NonPositive(_))
        ));
        assert!(matches!(
            ExchangeRates::from_official(dec!(3.2), 1, dec!(3.5), 0),
            Err(RateError::BadScale(0))
        ));
    }

    #[test]
    fn convert_rounds_each_step_independently() {
        let rates = ExchangeRates::from_official(dec!(3.2), 1, dec!(3.5), 100).unwrap();
        assert_eq!(rates.convert(dec!(1000)), (dec!(35.00), dec!(10.94)));

        // 0.035 * 13 = 0.455 -> 0.46 BYN; 0.46 / 3.2 = 0.14375 -> 0.14 USD
        assert_eq!(rates.convert(dec!(13)), (dec!(0.46), dec!(0.14)));
    }

    #[test]
    fn convert_is_half_up() {
        let rates = ExchangeRates::new(dec!(1), dec!(0.005)).unwrap();
        // 0.005 * 1 = 0.005 -> 0.01
        assert_eq!(rates.convert(dec!(1)), (dec!(0.01), dec!(0.01)));
    }

    #[test]
    fn fallback_rates_are_positive_and_marked() {
        let rates = ExchangeRates::fallback();
        assert_eq!(rates.byn_per_usd(), dec!(3.2));
        assert_eq!(rates.byn_per_rub(), dec!(0.035));
        assert_eq!(rates.origin(), RateOrigin::Fallback);
        assert_eq!(rates.convert(dec!(1000)), (dec!(35.00), dec!(10.94)));
    }

    #[test]
    fn cross_rate() {
        let rates = ExchangeRates::new(dec!(3.5), dec!(0.035)).unwrap();
        assert_eq!(rates.rub_per_usd(), dec!(100));
    }
}
