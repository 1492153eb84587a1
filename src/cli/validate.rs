use std::path::Path;
use std::str::FromStr;

use crate::core::metrics::CooccurMetric;

pub fn path(rawpath: &str) -> Result<(), String> {
    if !Path::new(&rawpath).exists() {
        Err(format!("{} doesn't exist or there is no permission to read it", rawpath))
    } else {
        Ok(())
    }
}

pub fn directory(rawpath: &str) -> Result<(), String> {
    if !Path::new(&rawpath).is_dir() {
        Err(format!("{} is not an existing directory", rawpath))
    } else {
        Ok(())
    }
}

pub fn metric(name: &str) -> Result<(), String> {
    CooccurMetric::from_str(name).map(|_| ())
}

pub fn numeric<T>(low: T, upper: T) -> impl Fn(&str) -> Result<(), String>
where
    T: FromStr + std::fmt::Display + std::cmp::PartialOrd + Sized,
    <T as FromStr>::Err: std::fmt::Debug,
{
    move |val: &str| -> Result<(), String> {
        let numeric = match val.parse::<T>() {
            Ok(x) => x,
            Err(_) => return Err(format!("failed to parse {}", val)),
        };

        if numeric < low || numeric > upper {
            return Err(format!("Value {} is expected to be inside [{}, {}] range", val, low, upper));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn metric() {
        for name in ["conj", "diff", "gated-diff", "outlier-diff", "ratio", "mutual-info"] {
            assert!(super::metric(name).is_ok());
        }
        for name in ["", "chi", "DIFF", "diff "] {
            assert!(super::metric(name).is_err());
        }
    }

    #[test]
    fn numeric() {
        let validator = super::numeric(10, 12);
        assert!(validator("9").is_err());
        assert!(validator("10").is_ok());
        assert!(validator("12").is_ok());
        assert!(validator("13").is_err());
        assert!(validator("1.5").is_err());
    }
}
