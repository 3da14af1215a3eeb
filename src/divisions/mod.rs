pub mod dataset;
pub mod error;
pub mod index;
pub mod matcher;

#[cfg(test)]
pub(crate) mod testing {
    //! A small but structurally faithful division set shared by tests:
    //! three provinces, nested cities/districts/towns, a duplicated district
    //! name, aliases and pinyin.

    use crate::divisions::index::DivisionIndex;
    use crate::types::division::{AdministrativeUnit, DivisionLevel, LatLon};
    use std::sync::Arc;

    #[allow(clippy::too_many_arguments)]
    fn unit(
        code: &str,
        name: &str,
        parent: Option<&str>,
        level: DivisionLevel,
        lat: f64,
        lon: f64,
        pinyin: &str,
        aliases: &[&str],
        population: Option<u64>,
    ) -> AdministrativeUnit {
        AdministrativeUnit {
            code: code.to_string(),
            name: name.to_string(),
            parent_code: parent.map(str::to_string),
            level,
            coordinate: LatLon(lat, lon),
            pinyin: pinyin.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            population,
        }
    }

    pub(crate) fn sample_units() -> Vec<AdministrativeUnit> {
        use DivisionLevel::*;
        vec![
            unit("110000", "北京市", None, Province, 39.90, 116.41, "beijing", &[], Some(21_893_095)),
            unit("110105", "朝阳区", Some("110000"), County, 39.92, 116.44, "chaoyang", &[], Some(3_452_460)),
            unit("220000", "吉林省", None, Province, 43.90, 125.33, "jilin", &[], Some(24_073_453)),
            unit("220100", "长春市", Some("220000"), City, 43.82, 125.32, "changchun", &[], Some(9_066_906)),
            unit("220104", "朝阳区", Some("220100"), County, 43.83, 125.29, "chaoyang", &[], Some(1_279_735)),
            unit("330000", "浙江省", None, Province, 30.27, 120.15, "zhejiang", &[], Some(64_567_588)),
            unit("330100", "杭州市", Some("330000"), City, 30.27, 120.16, "hangzhou", &["杭城"], Some(11_936_010)),
            unit("330106", "西湖区", Some("330100"), County, 30.26, 120.13, "xihu", &[], Some(1_112_992)),
            unit("330110", "余杭区", Some("330100"), County, 30.42, 120.30, "yuhang", &[], Some(1_226_673)),
            unit("330112", "临安区", Some("330100"), County, 30.23, 119.72, "lin'an", &[], Some(636_227)),
            unit("330110001", "仓前街道", Some("330110"), Town, 30.28, 120.06, "cangqian", &[], None),
            unit("330112001", "锦城街道", Some("330112"), Town, 30.23, 119.72, "jincheng", &[], None),
            unit("330112002", "青山湖街道", Some("330112"), Town, 30.25, 119.78, "qingshanhu", &[], None),
            unit("440000", "广东省", None, Province, 23.13, 113.26, "guangdong", &[], Some(126_012_510)),
        ]
    }

    pub(crate) fn sample_index() -> Arc<DivisionIndex> {
        Arc::new(DivisionIndex::new(sample_units()))
    }
}
