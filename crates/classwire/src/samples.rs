//! Sample entity classes used by `demo` and `dump`.

use classwire::codec::chrono::{DateTime, TimeDelta, Utc};
use classwire::codec::{Entity, TimeValue};
use classwire::session::{Catalog, DecodeResult};
use classwire::{Entity, WireEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, WireEnum)]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(name = "classwire.demo.Order", version = 1)]
pub struct Order {
    pub id: i64,
    pub symbol: String,
    #[wire(ordinal)]
    pub side: Side,
    pub quantity: i32,
    pub limit: Option<i64>,
    pub placed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    #[wire(skip)]
    pub attempts: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(name = "classwire.demo.Fill", version = 1)]
pub struct Fill {
    pub order_id: i64,
    pub quantity: i32,
    pub price: i64,
    pub latency: Option<TimeDelta>,
    pub venues: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(name = "classwire.demo.Heartbeat", alias = "classwire.demo.Ping")]
pub struct Heartbeat {
    pub sequence: i64,
    pub healthy: bool,
    pub next: Option<TimeValue>,
    pub lag: Vec<Option<i32>>,
}

const SYMBOLS: [&str; 4] = ["ACME", "GLOBEX", "INITECH", "UMBRELLA"];

/// Catalog holding every sample class.
pub fn catalog() -> DecodeResult<Catalog> {
    let mut catalog = Catalog::new();
    catalog.register::<Order>()?;
    catalog.register::<Fill>()?;
    catalog.register::<Heartbeat>()?;
    Ok(catalog)
}

/// Deterministic mix of sample entities: orders, their fills and heartbeats.
pub fn generate(count: usize, now: DateTime<Utc>) -> Vec<Box<dyn Entity>> {
    (0..count)
        .map(|i| {
            let n = i as i64;
            let symbol = SYMBOLS[i % SYMBOLS.len()];
            match i % 3 {
                0 => Box::new(Order {
                    id: n,
                    symbol: symbol.to_string(),
                    side: if i % 2 == 0 { Side::Buy } else { Side::Sell },
                    quantity: 100 * (i as i32 % 7 + 1),
                    limit: (i % 4 != 0).then_some(10_000 + n * 25),
                    placed_at: Some(now),
                    tags: if i % 5 == 0 {
                        vec!["open".to_string(), symbol.to_lowercase()]
                    } else {
                        Vec::new()
                    },
                    attempts: 0,
                }) as Box<dyn Entity>,
                1 => Box::new(Fill {
                    order_id: n - 1,
                    quantity: 50,
                    price: 10_000 + n * 25,
                    latency: Some(TimeDelta::milliseconds(n % 40)),
                    venues: vec![1, (n % 3) as i32 + 2],
                }),
                _ => Box::new(Heartbeat {
                    sequence: n / 3,
                    healthy: i % 7 != 0,
                    next: Some(TimeValue::relative(1_000)),
                    lag: vec![Some(0), Some((n % 11) as i32)],
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolves_alias() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.resolve("classwire.demo.Ping").map(|d| d.name),
            Some("classwire.demo.Heartbeat")
        );
    }

    #[test]
    fn generate_cycles_classes() {
        let entities = generate(6, DateTime::from_timestamp_millis(0).unwrap());
        let names: Vec<&str> = entities.iter().map(|e| e.descriptor().name).collect();
        assert_eq!(
            names,
            [
                "classwire.demo.Order",
                "classwire.demo.Fill",
                "classwire.demo.Heartbeat",
                "classwire.demo.Order",
                "classwire.demo.Fill",
                "classwire.demo.Heartbeat",
            ]
        );
    }
}
