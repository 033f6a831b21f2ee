//! Static chronology of Chinese dynasties and reign eras.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A historical dynasty or period with a fixed canonical span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dynasty {
	/// 商
	Shang,
	/// 春秋
	SpringAutumn,
	/// 战国
	WarringStates,
	/// 秦
	Qin,
	/// 汉, when the text does not say which half.
	Han,
	/// 西汉
	WesternHan,
	/// 新 (Wang Mang)
	Xin,
	/// 东汉
	EasternHan,
	/// 三国
	ThreeKingdoms,
	/// 西晋
	WesternJin,
	/// 东晋
	EasternJin,
	/// 南北朝
	NorthernSouthern,
	/// 隋
	Sui,
	/// 唐
	Tang,
	/// 五代十国
	FiveDynasties,
	/// 宋, when the text does not say which half.
	Song,
	/// 北宋
	NorthernSong,
	/// 南宋
	SouthernSong,
	/// 元
	Yuan,
	/// 明
	Ming,
	/// 清
	Qing,
}

struct DynastyEntry {
	dynasty: Dynasty,
	start: i32,
	end: i32,
	/// Year used when a record names the dynasty but nothing finer.
	representative: i32,
	/// Recognised spellings; the first one is the canonical name.
	aliases: &'static [&'static str],
}

const DYNASTIES: &[DynastyEntry] = &[
	DynastyEntry {
		dynasty: Dynasty::Shang,
		start: -1600,
		end: -1046,
		representative: -1323,
		aliases: &["商", "商朝", "商王朝", "商代"],
	},
	DynastyEntry {
		dynasty: Dynasty::SpringAutumn,
		start: -770,
		end: -476,
		representative: -623,
		aliases: &["春秋"],
	},
	DynastyEntry {
		dynasty: Dynasty::WarringStates,
		start: -475,
		end: -221,
		representative: -348,
		aliases: &["战国"],
	},
	DynastyEntry {
		dynasty: Dynasty::Qin,
		start: -221,
		end: -207,
		representative: -214,
		aliases: &["秦", "秦朝", "秦代"],
	},
	DynastyEntry {
		dynasty: Dynasty::Han,
		start: -202,
		end: 220,
		representative: 9,
		aliases: &["汉", "汉朝", "汉代"],
	},
	DynastyEntry {
		dynasty: Dynasty::WesternHan,
		start: -202,
		end: 8,
		representative: -97,
		aliases: &["西汉"],
	},
	DynastyEntry {
		dynasty: Dynasty::Xin,
		start: 9,
		end: 23,
		representative: 16,
		aliases: &["新朝"],
	},
	DynastyEntry {
		dynasty: Dynasty::EasternHan,
		start: 25,
		end: 220,
		representative: 123,
		aliases: &["东汉"],
	},
	DynastyEntry {
		dynasty: Dynasty::ThreeKingdoms,
		start: 220,
		end: 280,
		representative: 250,
		aliases: &["三国"],
	},
	DynastyEntry {
		dynasty: Dynasty::WesternJin,
		start: 265,
		end: 316,
		representative: 290,
		aliases: &["西晋"],
	},
	DynastyEntry {
		dynasty: Dynasty::EasternJin,
		start: 317,
		end: 420,
		representative: 368,
		aliases: &["东晋"],
	},
	DynastyEntry {
		dynasty: Dynasty::NorthernSouthern,
		start: 420,
		end: 589,
		representative: 505,
		aliases: &["南北朝"],
	},
	DynastyEntry {
		dynasty: Dynasty::Sui,
		start: 581,
		end: 618,
		representative: 600,
		aliases: &["隋", "隋朝", "隋代", "Sui"],
	},
	DynastyEntry {
		dynasty: Dynasty::Tang,
		start: 618,
		end: 907,
		representative: 763,
		aliases: &["唐", "唐朝", "唐代"],
	},
	DynastyEntry {
		dynasty: Dynasty::FiveDynasties,
		start: 907,
		end: 960,
		representative: 934,
		aliases: &["五代十国", "五代"],
	},
	DynastyEntry {
		dynasty: Dynasty::Song,
		start: 960,
		end: 1279,
		representative: 1120,
		aliases: &["宋", "宋朝", "宋代", "Song"],
	},
	DynastyEntry {
		dynasty: Dynasty::NorthernSong,
		start: 960,
		end: 1127,
		representative: 1044,
		aliases: &["北宋"],
	},
	DynastyEntry {
		dynasty: Dynasty::SouthernSong,
		start: 1127,
		end: 1279,
		representative: 1203,
		aliases: &["南宋"],
	},
	DynastyEntry {
		dynasty: Dynasty::Yuan,
		start: 1271,
		end: 1368,
		representative: 1300,
		aliases: &["元", "元朝", "元代"],
	},
	DynastyEntry {
		dynasty: Dynasty::Ming,
		start: 1368,
		end: 1644,
		representative: 1506,
		aliases: &["明", "明朝", "明代"],
	},
	DynastyEntry {
		dynasty: Dynasty::Qing,
		start: 1644,
		end: 1911,
		representative: 1777,
		aliases: &["清", "清朝", "清代", "清时期"],
	},
];

impl Dynasty {
	fn entry(self) -> &'static DynastyEntry {
		DYNASTIES
			.iter()
			.find(|e| e.dynasty == self)
			.unwrap_or(&DYNASTIES[0])
	}

	/// Canonical Chinese name.
	pub fn name(self) -> &'static str {
		self.entry().aliases[0]
	}

	/// Canonical `(start, end)` years; BCE years are negative.
	pub fn span(self) -> (i32, i32) {
		let e = self.entry();
		(e.start, e.end)
	}

	/// A single year standing in for the whole dynasty.
	pub fn representative_year(self) -> i32 {
		self.entry().representative
	}

	/// Resolves an exact alias (surrounding whitespace ignored).
	pub fn from_alias(text: &str) -> Option<Self> {
		let text = text.trim();
		DYNASTIES
			.iter()
			.find(|e| e.aliases.contains(&text))
			.map(|e| e.dynasty)
	}

	/// Finds the dynasty named somewhere inside `text`.
	///
	/// The longest matching alias wins so that 西汉 is not read as 汉 and 南宋 is
	/// not read as 宋; ties go to the earliest occurrence.
	pub fn find_in(text: &str) -> Option<Self> {
		DYNASTIES
			.iter()
			.flat_map(|e| e.aliases.iter().map(move |a| (e.dynasty, *a)))
			.filter_map(|(dynasty, alias)| text.find(alias).map(|pos| (dynasty, alias, pos)))
			.max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.2.cmp(&a.2)))
			.map(|(dynasty, _, _)| dynasty)
	}
}

impl fmt::Display for Dynasty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Renders a year the way the UI shows it: 公元前221年, 1068年.
pub fn format_year(year: i32) -> String {
	if year < 0 {
		format!("公元前{}年", -year)
	} else {
		format!("{}年", year)
	}
}

/// A reign era (年号) within a dynasty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reign {
	/// Era title, e.g. 光绪.
	pub name: &'static str,
	/// First year of the era.
	pub start: i32,
	/// Last year of the era.
	pub end: i32,
	/// Dynasty the era belongs to.
	pub dynasty: Dynasty,
}

impl Reign {
	/// Absolute year of "year `n`" of this era (year 1 is the first year).
	///
	/// `None` for year 0 and for numbers too large to be a year at all.
	pub fn year(&self, n: u32) -> Option<i32> {
		let offset = i32::try_from(n).ok()?.checked_sub(1)?;
		if offset < 0 {
			return None;
		}
		self.start.checked_add(offset)
	}

	/// Looks up an era by its exact name.
	pub fn named(name: &str) -> Option<&'static Reign> {
		REIGNS.iter().find(|r| r.name == name)
	}
}

const fn reign(name: &'static str, start: i32, end: i32, dynasty: Dynasty) -> Reign {
	Reign {
		name,
		start,
		end,
		dynasty,
	}
}

/// Every reign era the normalizer recognises.
pub const REIGNS: &[Reign] = &[
	reign("康熙", 1662, 1722, Dynasty::Qing),
	reign("雍正", 1723, 1735, Dynasty::Qing),
	reign("乾隆", 1736, 1795, Dynasty::Qing),
	reign("嘉庆", 1796, 1820, Dynasty::Qing),
	reign("道光", 1821, 1850, Dynasty::Qing),
	reign("咸丰", 1851, 1861, Dynasty::Qing),
	reign("同治", 1862, 1874, Dynasty::Qing),
	reign("光绪", 1875, 1908, Dynasty::Qing),
	reign("宣统", 1909, 1911, Dynasty::Qing),
	reign("洪武", 1368, 1398, Dynasty::Ming),
	reign("建文", 1399, 1402, Dynasty::Ming),
	reign("永乐", 1403, 1424, Dynasty::Ming),
	reign("洪熙", 1425, 1425, Dynasty::Ming),
	reign("宣德", 1426, 1435, Dynasty::Ming),
	reign("正统", 1436, 1449, Dynasty::Ming),
	reign("景泰", 1450, 1456, Dynasty::Ming),
	reign("天顺", 1457, 1464, Dynasty::Ming),
	reign("成化", 1465, 1487, Dynasty::Ming),
	reign("弘治", 1488, 1505, Dynasty::Ming),
	reign("正德", 1506, 1521, Dynasty::Ming),
	reign("嘉靖", 1522, 1566, Dynasty::Ming),
	reign("隆庆", 1567, 1572, Dynasty::Ming),
	reign("万历", 1573, 1620, Dynasty::Ming),
	reign("泰昌", 1620, 1620, Dynasty::Ming),
	reign("天启", 1621, 1627, Dynasty::Ming),
	reign("崇祯", 1628, 1644, Dynasty::Ming),
	reign("元统", 1333, 1333, Dynasty::Yuan),
	reign("至元", 1335, 1340, Dynasty::Yuan),
	reign("至正", 1341, 1368, Dynasty::Yuan),
	reign("元丰", 1078, 1085, Dynasty::NorthernSong),
	reign("元祐", 1086, 1093, Dynasty::NorthernSong),
	reign("绍圣", 1094, 1097, Dynasty::NorthernSong),
	reign("建炎", 1127, 1130, Dynasty::SouthernSong),
	reign("绍兴", 1131, 1162, Dynasty::SouthernSong),
	reign("隆兴", 1163, 1164, Dynasty::SouthernSong),
	reign("乾道", 1165, 1173, Dynasty::SouthernSong),
	reign("淳熙", 1174, 1189, Dynasty::SouthernSong),
	reign("庆元", 1195, 1200, Dynasty::SouthernSong),
];
