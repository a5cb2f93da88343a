use crate::corpus::Corpus;
use crate::patterns::AVG_DAILY_META;

/// Average daily traffic advertised in the page's `og:description` meta.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvgDaily {
    /// `"<number> <unit>"`, unit as written on the page.
    pub data: Option<String>,
    pub users: Option<String>,
}

pub fn extract_avg_daily(corpus: &Corpus) -> AvgDaily {
    let hit = corpus.first_match(|text| {
        let caps = AVG_DAILY_META.captures(text)?;
        let amount = caps.get(1)?.as_str();
        let unit = caps.get(2)?.as_str();
        let users = caps.get(3)?.as_str();
        Some((format!("{amount} {unit}"), users.to_string()))
    });

    match hit {
        Some((_, (data, users))) => AvgDaily {
            data: Some(data),
            users: Some(users),
        },
        None => AvgDaily::default(),
    }
}
