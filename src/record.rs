//! Municipality population record and the fixed set of census years

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Year {
    Y2018,
    Y2019,
    Y2020,
    Y2021,
}

impl Year {
    pub fn all() -> [Year; 4] {
        [Year::Y2018, Year::Y2019, Year::Y2020, Year::Y2021]
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            Year::Y2018 => 2018,
            Year::Y2019 => 2019,
            Year::Y2020 => 2020,
            Year::Y2021 => 2021,
        }
    }

    /// Column holding this year's population in the municipios table
    pub fn column(&self) -> &'static str {
        match self {
            Year::Y2018 => "population_2018",
            Year::Y2019 => "population_2019",
            Year::Y2020 => "population_2020",
            Year::Y2021 => "population_2021",
        }
    }

    fn index(&self) -> usize {
        match self {
            Year::Y2018 => 0,
            Year::Y2019 => 1,
            Year::Y2020 => 2,
            Year::Y2021 => 3,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl FromStr for Year {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2018" => Ok(Year::Y2018),
            "2019" => Ok(Year::Y2019),
            "2020" => Ok(Year::Y2020),
            "2021" => Ok(Year::Y2021),
            other => Err(format!("unsupported year '{}' (expected 2018-2021)", other)),
        }
    }
}

/// One municipality with its population for each census year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub region_code: String,
    /// Indexed in `Year::all()` order
    pub population: [u32; 4],
}

impl Record {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        region_code: impl Into<String>,
        population: [u32; 4],
    ) -> Self {
        Self {
            id,
            name: name.into(),
            region_code: region_code.into(),
            population,
        }
    }

    pub fn population(&self, year: Year) -> u32 {
        self.population[year.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_by_year() {
        let record = Record::new(
            3550308,
            "São Paulo",
            "SP",
            [12176866, 12252023, 12325232, 12396372],
        );

        assert_eq!(record.population(Year::Y2018), 12176866);
        assert_eq!(record.population(Year::Y2021), 12396372);
    }

    #[test]
    fn test_year_parsing() {
        assert_eq!("2020".parse::<Year>().unwrap(), Year::Y2020);
        assert_eq!(" 2019 ".parse::<Year>().unwrap(), Year::Y2019);
        assert!("2022".parse::<Year>().is_err());
        assert!("abc".parse::<Year>().is_err());
    }

    #[test]
    fn test_year_columns_are_distinct() {
        let columns: Vec<&str> = Year::all().iter().map(|y| y.column()).collect();
        assert_eq!(
            columns,
            vec!["population_2018", "population_2019", "population_2020", "population_2021"]
        );
        assert_eq!(Year::Y2021.to_string(), "2021");
    }
}
