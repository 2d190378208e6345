//! OpenWeather "current weather" payload and its mapping into [`WeatherRecord`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::LookupError,
    model::{WeatherRecord, kelvin_to_celsius},
};

#[derive(Debug, Deserialize)]
struct OwCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    sys: OwSys,
}

/// Parse a current-weather body into a record stamped with `observed_at`.
///
/// Any missing or wrong-typed field, or an empty `weather` list, yields
/// [`LookupError::MalformedResponse`].
pub fn parse_current(body: &str, observed_at: DateTime<Utc>) -> Result<WeatherRecord, LookupError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::malformed(format!("invalid current weather JSON: {e}")))?;

    let OwCurrentResponse { coord, weather, main, wind, sys } = parsed;

    let condition = weather
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::malformed("`weather` contained no entries"))?;

    if main.humidity > 100 {
        return Err(LookupError::malformed(format!(
            "`main.humidity` out of range: {}",
            main.humidity
        )));
    }

    Ok(WeatherRecord {
        country: sys.country,
        temperature_celsius: kelvin_to_celsius(main.temp),
        description: condition.description,
        humidity_percent: main.humidity,
        wind_speed: wind.speed,
        icon_code: condition.icon,
        longitude: coord.lon,
        latitude: coord.lat,
        observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn sample() -> Value {
        json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [
                { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" },
                { "id": 701, "main": "Mist", "description": "mist", "icon": "50d" }
            ],
            "base": "stations",
            "main": { "temp": 300.15, "feels_like": 301.0, "pressure": 1012, "humidity": 40 },
            "wind": { "speed": 3.6, "deg": 250 },
            "sys": { "country": "GB", "sunrise": 1700000000 },
            "name": "London",
            "cod": 200
        })
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn remove(payload: &mut Value, pointer: &str) {
        let (parent, key) = pointer.rsplit_once('/').unwrap();
        let target = payload.pointer_mut(parent).unwrap();
        match target {
            Value::Object(map) => {
                map.remove(key);
            }
            other => panic!("unexpected parent {other:?}"),
        }
    }

    #[test]
    fn maps_every_field() {
        let record = parse_current(&sample().to_string(), at()).unwrap();

        assert_eq!(record.country(), "GB");
        assert_eq!(record.temperature_celsius(), 27.0);
        assert_eq!(record.description(), "clear sky");
        assert_eq!(record.humidity_percent(), 40);
        assert_eq!(record.wind_speed(), 3.6);
        assert_eq!(record.icon_code(), "01d");
        assert_eq!(record.longitude(), -0.1257);
        assert_eq!(record.latitude(), 51.5085);
        assert_eq!(record.observed_at(), at());
    }

    #[test]
    fn integral_kelvin_values_are_accepted() {
        let mut payload = sample();
        payload["main"]["temp"] = json!(290);
        payload["wind"]["speed"] = json!(2);

        let record = parse_current(&payload.to_string(), at()).unwrap();
        assert_eq!(record.temperature_celsius(), 16.9);
        assert_eq!(record.wind_speed(), 2.0);
    }

    #[test]
    fn each_required_field_is_enforced() {
        let required = [
            "/sys/country",
            "/main/temp",
            "/weather/0/description",
            "/main/humidity",
            "/wind/speed",
            "/weather/0/icon",
            "/coord/lon",
            "/coord/lat",
        ];

        for pointer in required {
            let mut payload = sample();
            remove(&mut payload, pointer);

            let err = parse_current(&payload.to_string(), at()).unwrap_err();
            assert!(
                matches!(err, LookupError::MalformedResponse(_)),
                "removing {pointer} gave {err:?}"
            );
        }
    }

    #[test]
    fn empty_weather_list_is_malformed() {
        let mut payload = sample();
        payload["weather"] = json!([]);

        let err = parse_current(&payload.to_string(), at()).unwrap_err();
        assert_eq!(err, LookupError::malformed("`weather` contained no entries"));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let mut payload = sample();
        payload["main"]["temp"] = json!("hot");
        assert!(matches!(
            parse_current(&payload.to_string(), at()),
            Err(LookupError::MalformedResponse(_))
        ));

        let mut payload = sample();
        payload["main"]["humidity"] = json!(40.5);
        assert!(matches!(
            parse_current(&payload.to_string(), at()),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn humidity_above_hundred_is_malformed() {
        let mut payload = sample();
        payload["main"]["humidity"] = json!(140);

        let err = parse_current(&payload.to_string(), at()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_current("<html>oops</html>", at()).unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }
}
