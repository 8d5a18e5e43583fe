/// Temperature bands, coldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TempBand {
    Freezing,
    VeryCold,
    Cold,
    Chilly,
    Cool,
    Mild,
    Warm,
    Hot,
    /// Has a seasonal item but `classify` never produces it; `Hot` is unbounded above.
    VeryHot,
}

/// Band for a temperature in °C. Upper bounds are inclusive.
pub fn classify(temp: i32) -> TempBand {
    match temp {
        t if t <= -5 => TempBand::Freezing,
        t if t <= 4 => TempBand::VeryCold,
        t if t <= 9 => TempBand::Cold,
        t if t <= 16 => TempBand::Chilly,
        t if t <= 19 => TempBand::Cool,
        t if t <= 22 => TempBand::Mild,
        t if t <= 27 => TempBand::Warm,
        _ => TempBand::Hot,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Case-insensitive; anything other than "female" means male.
    pub fn from_preference(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "female" => Gender::Female,
            _ => Gender::Male,
        }
    }
}

pub fn outfit(gender: Gender, band: TempBand) -> Option<&'static str> {
    let outfit = match (gender, band) {
        (Gender::Male, TempBand::Freezing) => "히트텍 + 니트 + 롱패딩, 기모바지",
        (Gender::Male, TempBand::VeryCold) => "히트텍 + 맨투맨 + 패딩, 기모바지",
        (Gender::Male, TempBand::Cold) => "니트 + 코트, 슬랙스",
        (Gender::Male, TempBand::Chilly) => "셔츠 + 트렌치코트, 면바지",
        (Gender::Male, TempBand::Cool) => "가디건 + 셔츠, 슬랙스",
        (Gender::Male, TempBand::Mild) => "긴팔 셔츠, 면바지",
        (Gender::Male, TempBand::Warm) => "반팔 + 얇은 셔츠, 면바지",
        (Gender::Male, TempBand::Hot) => "반팔, 반바지",
        (Gender::Female, TempBand::Freezing) => "히트텍 + 니트 + 롱패딩, 기모레깅스",
        (Gender::Female, TempBand::VeryCold) => "터틀넥 + 패딩, 기모스커트+타이츠",
        (Gender::Female, TempBand::Cold) => "니트 + 롱코트, 슬랙스",
        (Gender::Female, TempBand::Chilly) => "블라우스 + 트렌치코트, 와이드팬츠",
        (Gender::Female, TempBand::Cool) => "가디건 + 원피스, 얇은 스타킹",
        (Gender::Female, TempBand::Mild) => "긴팔 블라우스, 면바지",
        (Gender::Female, TempBand::Warm) => "반팔 블라우스, 린넨팬츠",
        (Gender::Female, TempBand::Hot) => "민소매, 반바지",
        (_, TempBand::VeryHot) => return None,
    };
    Some(outfit)
}

pub fn seasonal_item(band: TempBand) -> Option<&'static str> {
    match band {
        TempBand::Freezing => Some("🔥 손난로 챙기고 핫팩 붙여!"),
        TempBand::VeryCold => Some("🧣 목도리랑 장갑 필수!"),
        TempBand::Cold => Some("🧤 장갑 챙겨!"),
        TempBand::Hot => Some("🧴 선크림 바르고 물 많이 마셔!"),
        TempBand::VeryHot => Some("🧊 아이스팩 챙기고 그늘로 다녀!"),
        _ => None,
    }
}
