//! Layout of the per-vector parameter (PVP) sets.

use crate::metadata::data::PVP_WORD_SIZE;
use crate::types::{CphdError, CphdResult};
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Position of one parameter inside a PVP set. Offset and size count 8-byte words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvpType {
    pub offset: u64,
    pub size: u64,
    pub format: String,
}

impl PvpType {
    pub fn new(offset: u64, size: u64, format: impl Into<String>) -> Self {
        Self { offset, size, format: format.into() }
    }

    /// Scalar double parameter
    pub fn f8(offset: u64) -> Self {
        Self::new(offset, 1, "F8")
    }

    /// Three-component double parameter
    pub fn xyz(offset: u64) -> Self {
        Self::new(offset, 3, "X=F8;Y=F8;Z=F8;")
    }

    pub fn byte_offset(&self) -> CphdResult<usize> {
        self.words_to_bytes(self.offset)
    }

    pub fn byte_len(&self) -> CphdResult<usize> {
        self.words_to_bytes(self.size)
    }

    /// First word past the parameter
    pub fn end_word(&self) -> CphdResult<u64> {
        let end = self.offset.checked_add(self.size).ok_or_else(|| self.overflow())?;
        self.words_to_bytes(end)?;
        Ok(end)
    }

    fn words_to_bytes(&self, words: u64) -> CphdResult<usize> {
        words
            .checked_mul(PVP_WORD_SIZE)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> CphdError {
        CphdError::invalid_value(
            "",
            format!("offset {} and size {} words exceed the addressable range", self.offset, self.size),
        )
    }
}

/// User-defined PVP entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedPvp {
    pub name: String,
    pub param: PvpType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pvp {
    pub tx_time: PvpType,
    pub tx_pos: PvpType,
    pub tx_vel: PvpType,
    pub rcv_time: PvpType,
    pub rcv_pos: PvpType,
    pub rcv_vel: PvpType,
    pub srp_pos: PvpType,
    pub amp_sf: Option<PvpType>,
    pub a_fdop: PvpType,
    pub a_frr1: PvpType,
    pub a_frr2: PvpType,
    pub fx1: PvpType,
    pub fx2: PvpType,
    pub fxn1: Option<PvpType>,
    pub fxn2: Option<PvpType>,
    pub toa1: PvpType,
    pub toa2: PvpType,
    pub toae1: Option<PvpType>,
    pub toae2: Option<PvpType>,
    pub td_tropo_srp: PvpType,
    pub td_iono_srp: Option<PvpType>,
    pub sc0: PvpType,
    pub scss: PvpType,
    pub signal: Option<PvpType>,
    pub added_pvp: Vec<AddedPvp>,
}

impl Default for Pvp {
    /// The required parameters packed in standard order
    fn default() -> Self {
        Self {
            tx_time: PvpType::f8(0),
            tx_pos: PvpType::xyz(1),
            tx_vel: PvpType::xyz(4),
            rcv_time: PvpType::f8(7),
            rcv_pos: PvpType::xyz(8),
            rcv_vel: PvpType::xyz(11),
            srp_pos: PvpType::xyz(14),
            amp_sf: None,
            a_fdop: PvpType::f8(17),
            a_frr1: PvpType::f8(18),
            a_frr2: PvpType::f8(19),
            fx1: PvpType::f8(20),
            fx2: PvpType::f8(21),
            fxn1: None,
            fxn2: None,
            toa1: PvpType::f8(22),
            toa2: PvpType::f8(23),
            toae1: None,
            toae2: None,
            td_tropo_srp: PvpType::f8(24),
            td_iono_srp: None,
            sc0: PvpType::f8(25),
            scss: PvpType::f8(26),
            signal: None,
            added_pvp: Vec::new(),
        }
    }
}

impl Pvp {
    /// Words spanned by every declared parameter
    pub fn required_words(&self) -> CphdResult<u64> {
        let mut end = 0;
        for param in self.parameters() {
            end = end.max(param.end_word().map_err(|e| e.within("PVP"))?);
        }
        for added in &self.added_pvp {
            let word = added
                .param
                .end_word()
                .map_err(|e| e.within(&format!("PVP/AddedPVP/{}", added.name)))?;
            end = end.max(word);
        }
        Ok(end)
    }

    /// Bytes spanned by every declared parameter
    pub fn required_bytes(&self) -> CphdResult<u64> {
        // end_word already guarantees the byte count fits
        Ok(self.required_words()? * PVP_WORD_SIZE)
    }

    /// Standard parameters that are present
    pub fn parameters(&self) -> Vec<&PvpType> {
        let mut params = vec![
            &self.tx_time,
            &self.tx_pos,
            &self.tx_vel,
            &self.rcv_time,
            &self.rcv_pos,
            &self.rcv_vel,
            &self.srp_pos,
            &self.a_fdop,
            &self.a_frr1,
            &self.a_frr2,
            &self.fx1,
            &self.fx2,
            &self.toa1,
            &self.toa2,
            &self.td_tropo_srp,
            &self.sc0,
            &self.scss,
        ];
        for optional in [
            &self.amp_sf,
            &self.fxn1,
            &self.fxn2,
            &self.toae1,
            &self.toae2,
            &self.td_iono_srp,
            &self.signal,
        ] {
            if let Some(p) = optional {
                params.push(p);
            }
        }
        params
    }

    pub fn added(&self, name: &str) -> Option<&PvpType> {
        self.added_pvp.iter().find(|a| a.name == name).map(|a| &a.param)
    }
}

impl XmlCodec for PvpType {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Offset", &self.offset);
        element.add_value("Size", &self.size);
        element.add_value("Format", &self.format);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let param = Self {
            offset: node.required_value("Offset")?,
            size: node.required_value("Size")?,
            format: node.required_value("Format")?,
        };
        param.end_word().map_err(|e| e.map_path(|_| node.path().to_string()))?;
        Ok(param)
    }
}

impl XmlCodec for AddedPvp {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Name", &self.name);
        self.param.encode(element)
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self { name: node.required_value("Name")?, param: PvpType::decode(node)? })
    }
}

impl XmlCodec for Pvp {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_child("TxTime", &self.tx_time)?;
        element.add_child("TxPos", &self.tx_pos)?;
        element.add_child("TxVel", &self.tx_vel)?;
        element.add_child("RcvTime", &self.rcv_time)?;
        element.add_child("RcvPos", &self.rcv_pos)?;
        element.add_child("RcvVel", &self.rcv_vel)?;
        element.add_child("SRPPos", &self.srp_pos)?;
        element.add_optional_child("AmpSF", &self.amp_sf)?;
        element.add_child("aFDOP", &self.a_fdop)?;
        element.add_child("aFRR1", &self.a_frr1)?;
        element.add_child("aFRR2", &self.a_frr2)?;
        element.add_child("FX1", &self.fx1)?;
        element.add_child("FX2", &self.fx2)?;
        element.add_optional_child("FXN1", &self.fxn1)?;
        element.add_optional_child("FXN2", &self.fxn2)?;
        element.add_child("TOA1", &self.toa1)?;
        element.add_child("TOA2", &self.toa2)?;
        element.add_optional_child("TOAE1", &self.toae1)?;
        element.add_optional_child("TOAE2", &self.toae2)?;
        element.add_child("TDTropoSRP", &self.td_tropo_srp)?;
        element.add_optional_child("TDIonoSRP", &self.td_iono_srp)?;
        element.add_child("SC0", &self.sc0)?;
        element.add_child("SCSS", &self.scss)?;
        element.add_optional_child("SIGNAL", &self.signal)?;
        element.add_list("AddedPVP", &self.added_pvp)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            tx_time: node.required_child("TxTime")?,
            tx_pos: node.required_child("TxPos")?,
            tx_vel: node.required_child("TxVel")?,
            rcv_time: node.required_child("RcvTime")?,
            rcv_pos: node.required_child("RcvPos")?,
            rcv_vel: node.required_child("RcvVel")?,
            srp_pos: node.required_child("SRPPos")?,
            amp_sf: node.optional_child("AmpSF")?,
            a_fdop: node.required_child("aFDOP")?,
            a_frr1: node.required_child("aFRR1")?,
            a_frr2: node.required_child("aFRR2")?,
            fx1: node.required_child("FX1")?,
            fx2: node.required_child("FX2")?,
            fxn1: node.optional_child("FXN1")?,
            fxn2: node.optional_child("FXN2")?,
            toa1: node.required_child("TOA1")?,
            toa2: node.required_child("TOA2")?,
            toae1: node.optional_child("TOAE1")?,
            toae2: node.optional_child("TOAE2")?,
            td_tropo_srp: node.required_child("TDTropoSRP")?,
            td_iono_srp: node.optional_child("TDIonoSRP")?,
            sc0: node.required_child("SC0")?,
            scss: node.required_child("SCSS")?,
            signal: node.optional_child("SIGNAL")?,
            added_pvp: node.list("AddedPVP")?,
        })
    }
}
