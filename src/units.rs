pub mod temperature {
    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum TemperatureUnit {
        #[default]
        Celsius,
        Fahrenheit,
    }

    impl TemperatureUnit {
        pub fn toggle(self) -> Self {
            match self {
                Self::Celsius => Self::Fahrenheit,
                Self::Fahrenheit => Self::Celsius,
            }
        }

        pub fn symbol(self) -> &'static str {
            match self {
                Self::Celsius => "°C",
                Self::Fahrenheit => "°F",
            }
        }

        /// Literal token written to the preference store.
        pub fn token(self) -> &'static str {
            match self {
                Self::Celsius => "celsius",
                Self::Fahrenheit => "fahrenheit",
            }
        }

        pub fn from_token(token: &str) -> Option<Self> {
            match token.trim() {
                "celsius" => Some(Self::Celsius),
                "fahrenheit" => Some(Self::Fahrenheit),
                _ => None,
            }
        }

        /// Converts a canonical Celsius reading into this unit.
        pub fn convert(self, temp_c: f64) -> f64 {
            match self {
                Self::Celsius => temp_c,
                Self::Fahrenheit => c2f(temp_c),
            }
        }
    }

    /// Rounded display string for a canonical Celsius reading, e.g. `77°F`.
    pub fn display(temp_c: f64, unit: TemperatureUnit) -> String {
        format!("{:.0}{}", whole(unit.convert(temp_c)), unit.symbol())
    }

    /// Rounded degrees without the unit letter, as used in forecast columns.
    pub fn degrees(value: f64) -> String {
        format!("{:.0}°", whole(value))
    }

    // Halves round up, so -2.5 shows as -2. Adding 0.0 folds -0 into 0 so
    // "-0°" never shows up.
    fn whole(value: f64) -> f64 {
        (value + 0.5).floor() + 0.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert_eq!(c2f(-40.0), -40.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(display(25.0, TemperatureUnit::Fahrenheit), "77°F");
        assert_eq!(display(25.0, TemperatureUnit::Celsius), "25°C");
        assert_eq!(display(21.6, TemperatureUnit::Celsius), "22°C");
        assert_eq!(display(-3.2, TemperatureUnit::Celsius), "-3°C");
        assert_eq!(display(-0.3, TemperatureUnit::Celsius), "0°C");
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(display(-2.5, TemperatureUnit::Celsius), "-2°C");
        assert_eq!(display(-0.5, TemperatureUnit::Celsius), "0°C");
        assert_eq!(display(2.5, TemperatureUnit::Celsius), "3°C");
        assert_eq!(degrees(-7.5), "-7°");
        assert_eq!(degrees(-7.6), "-8°");
    }

    #[test]
    fn test_toggle_twice_restores_display() {
        let unit = TemperatureUnit::Celsius;
        let before = display(18.4, unit);
        let after = display(18.4, unit.toggle().toggle());
        assert_eq!(before, after);
        assert_ne!(display(18.4, unit.toggle()), before);
    }

    #[test]
    fn test_token_round_trip() {
        assert_eq!(TemperatureUnit::from_token("fahrenheit"), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(TemperatureUnit::from_token("celsius\n"), Some(TemperatureUnit::Celsius));
        assert_eq!(TemperatureUnit::from_token("kelvin"), None);
        assert_eq!(TemperatureUnit::Fahrenheit.token(), "fahrenheit");
    }
}
