use crate::model::Weather;

/// Render weather as the fixed three-line report shown to the user and
/// stored in history.
pub fn format_weather(weather: &Weather) -> String {
    format!(
        "{}, температура {} °C, {}\nВосход: {}\nЗакат: {}\n",
        weather.city,
        weather.temperature,
        weather.category.label(),
        weather.sunrise.format("%H:%M"),
        weather.sunset.format("%H:%M"),
    )
}
