use crate::types::{CphdResult, Parameter};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Relationships between this collection and other collections
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_types: Vec<MatchType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchType {
    pub type_id: String,
    pub current_index: Option<u64>,
    pub match_collections: Vec<MatchCollection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCollection {
    pub core_name: String,
    pub match_index: Option<u64>,
    pub parameters: Vec<Parameter>,
}

impl XmlCodec for MatchCollection {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("CoreName", &self.core_name);
        element.add_optional_value("MatchIndex", &self.match_index);
        element.add_parameters("Parameter", &self.parameters);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            core_name: node.required_value("CoreName")?,
            match_index: node.optional_value("MatchIndex")?,
            parameters: node.parameters("Parameter")?,
        })
    }
}

impl XmlCodec for MatchType {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("TypeID", &self.type_id);
        element.add_optional_value("CurrentIndex", &self.current_index);
        element.add_value("NumMatchCollections", &self.match_collections.len());
        element.add_indexed_list("MatchCollection", &self.match_collections)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let match_collections = node.list("MatchCollection")?;
        node.check_count("NumMatchCollections", match_collections.len())?;
        Ok(Self {
            type_id: node.required_value("TypeID")?,
            current_index: node.optional_value("CurrentIndex")?,
            match_collections,
        })
    }
}

impl XmlCodec for MatchInfo {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("NumMatchTypes", &self.match_types.len());
        element.add_indexed_list("MatchType", &self.match_types)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let match_types = node.list("MatchType")?;
        node.check_count("NumMatchTypes", match_types.len())?;
        Ok(Self { match_types })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_attribute_is_advisory() {
        let doc = Element::parse_str(
            r#"<MatchInfo><NumMatchTypes>5</NumMatchTypes>
                 <MatchType index="9"><TypeID>B</TypeID><NumMatchCollections>0</NumMatchCollections></MatchType>
                 <MatchType index="2"><TypeID>A</TypeID><NumMatchCollections>1</NumMatchCollections>
                   <MatchCollection index="4"><CoreName>C1</CoreName></MatchCollection>
                 </MatchType>
               </MatchInfo>"#,
        )
        .unwrap();
        let info = MatchInfo::decode(&XmlNode::root(&doc)).unwrap();
        assert_eq!(info.match_types.len(), 2);
        assert_eq!(info.match_types[0].type_id, "B");
        assert_eq!(info.match_types[1].match_collections[0].core_name, "C1");

        let mut element = Element::new("MatchInfo");
        info.encode(&mut element).unwrap();
        let indices: Vec<_> = element.children_named("MatchType").filter_map(|e| e.attribute("index")).collect();
        assert_eq!(indices, vec!["1", "2"]);
    }
}
