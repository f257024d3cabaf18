use crate::models::{
    round2, DailyConsumption, DailyRecord, ParticipationShare, TemperatureConsumption,
};

pub const INSUFFICIENT_DATA_MESSAGE: &str = "No hay datos suficientes.";

/// Liters per neighborhood per day, oldest first. Equal dates keep input order.
pub fn daily_consumption(history: &[DailyRecord]) -> Vec<DailyConsumption> {
    let mut rows: Vec<DailyConsumption> = history
        .iter()
        .map(|r| DailyConsumption {
            date: r.date.clone(),
            el_dorado: r.el_dorado.total_liters,
            manzanares: r.manzanares.total_liters,
        })
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}

pub fn temperature_vs_consumption(history: &[DailyRecord]) -> Vec<TemperatureConsumption> {
    let mut rows: Vec<TemperatureConsumption> = history
        .iter()
        .map(|r| TemperatureConsumption {
            date: r.date.clone(),
            temperature: r.temperature,
            total_liters: r.total_liters(),
        })
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}

/// Each neighborhood's percentage of all recorded liters.
pub fn participation_share(history: &[DailyRecord]) -> ParticipationShare {
    let (el_dorado, manzanares) = history.iter().fold((0.0, 0.0), |(d, m), r| {
        (d + r.el_dorado.total_liters, m + r.manzanares.total_liters)
    });
    let total = el_dorado + manzanares;

    if total == 0.0 {
        return ParticipationShare::InsufficientData {
            error: INSUFFICIENT_DATA_MESSAGE.to_string(),
        };
    }

    ParticipationShare::Shares {
        el_dorado: round2(el_dorado / total * 100.0),
        manzanares: round2(manzanares / total * 100.0),
        total_liters: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NeighborhoodSample;

    fn record(date: &str, dorado: f64, manzanares: f64, temperature: f64) -> DailyRecord {
        DailyRecord {
            date: date.into(),
            el_dorado: NeighborhoodSample {
                total_liters: dorado,
                population: 1.0,
            },
            manzanares: NeighborhoodSample {
                total_liters: manzanares,
                population: 1.0,
            },
            temperature,
        }
    }

    #[test]
    fn daily_rows_sorted_by_date() {
        let rows = daily_consumption(&[
            record("2024-03-02", 2.0, 20.0, 0.0),
            record("2024-03-01", 1.0, 10.0, 0.0),
            record("2024-02-28", 3.0, 30.0, 0.0),
        ]);
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-02-28", "2024-03-01", "2024-03-02"]);
        assert_eq!(rows[1].el_dorado, 1.0);
        assert_eq!(rows[1].manzanares, 10.0);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let rows = daily_consumption(&[
            record("2024-03-02", 1.0, 0.0, 0.0),
            record("2024-03-01", 9.0, 0.0, 0.0),
            record("2024-03-02", 2.0, 0.0, 0.0),
            record("2024-03-02", 3.0, 0.0, 0.0),
        ]);
        let liters: Vec<f64> = rows.iter().map(|r| r.el_dorado).collect();
        assert_eq!(liters, [9.0, 1.0, 2.0, 3.0]);

        let rows = temperature_vs_consumption(&[
            record("2024-03-02", 1.0, 0.0, 30.0),
            record("2024-03-02", 2.0, 0.0, 31.0),
        ]);
        assert_eq!(rows[0].temperature, 30.0);
        assert_eq!(rows[1].temperature, 31.0);
    }

    #[test]
    fn temperature_rows_sum_both_neighborhoods() {
        let rows = temperature_vs_consumption(&[
            record("2024-03-02", 2.5, 20.0, 33.1),
            record("2024-03-01", 1.0, 10.0, 29.0),
        ]);
        assert_eq!(rows[0].date, "2024-03-01");
        assert_eq!(rows[0].total_liters, 11.0);
        assert_eq!(rows[1].temperature, 33.1);
        assert_eq!(rows[1].total_liters, 22.5);
    }

    #[test]
    fn shares_add_up_to_one_hundred() {
        let share = participation_share(&[
            record("a", 1.0, 2.0, 0.0),
            record("b", 0.0, 0.0, 0.0),
        ]);
        match share {
            ParticipationShare::Shares {
                el_dorado,
                manzanares,
                total_liters,
            } => {
                assert_eq!(el_dorado, 33.33);
                assert_eq!(manzanares, 66.67);
                assert_eq!(total_liters, 3.0);
                assert!((el_dorado + manzanares - 100.0).abs() <= 0.01);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn zero_total_is_insufficient_data() {
        assert_eq!(
            participation_share(&[record("a", 0.0, 0.0, 12.0)]),
            ParticipationShare::InsufficientData {
                error: INSUFFICIENT_DATA_MESSAGE.into()
            }
        );
        assert!(matches!(
            participation_share(&[]),
            ParticipationShare::InsufficientData { .. }
        ));
    }

    #[test]
    fn empty_history_gives_empty_tables() {
        assert!(daily_consumption(&[]).is_empty());
        assert!(temperature_vs_consumption(&[]).is_empty());
    }
}
