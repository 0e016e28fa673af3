use crate::enums::PolarizationType;
use crate::types::CphdResult;
use crate::xml::{Element, XmlCodec, XmlNode};
use serde::{Deserialize, Serialize};

/// Transmit waveform and receiver configurations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxRcv {
    pub tx_wf_parameters: Vec<TxWfParameters>,
    pub rcv_parameters: Vec<RcvParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxWfParameters {
    pub identifier: String,
    pub pulse_length: f64,
    pub rf_bandwidth: f64,
    pub freq_center: f64,
    pub lfm_rate: Option<f64>,
    pub polarization: PolarizationType,
    pub power: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcvParameters {
    pub identifier: String,
    pub window_length: f64,
    pub sample_rate: f64,
    pub if_filter_bw: f64,
    pub freq_center: f64,
    pub lfm_rate: Option<f64>,
    pub polarization: PolarizationType,
    pub path_gain: Option<f64>,
}

impl XmlCodec for TxWfParameters {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("PulseLength", &self.pulse_length);
        element.add_value("RFBandwidth", &self.rf_bandwidth);
        element.add_value("FreqCenter", &self.freq_center);
        element.add_optional_value("LFMRate", &self.lfm_rate);
        element.add_value("Polarization", &self.polarization);
        element.add_optional_value("Power", &self.power);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            pulse_length: node.required_value("PulseLength")?,
            rf_bandwidth: node.required_value("RFBandwidth")?,
            freq_center: node.required_value("FreqCenter")?,
            lfm_rate: node.optional_value("LFMRate")?,
            polarization: node.required_value("Polarization")?,
            power: node.optional_value("Power")?,
        })
    }
}

impl XmlCodec for RcvParameters {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("Identifier", &self.identifier);
        element.add_value("WindowLength", &self.window_length);
        element.add_value("SampleRate", &self.sample_rate);
        element.add_value("IFFilterBW", &self.if_filter_bw);
        element.add_value("FreqCenter", &self.freq_center);
        element.add_optional_value("LFMRate", &self.lfm_rate);
        element.add_value("Polarization", &self.polarization);
        element.add_optional_value("PathGain", &self.path_gain);
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        Ok(Self {
            identifier: node.required_value("Identifier")?,
            window_length: node.required_value("WindowLength")?,
            sample_rate: node.required_value("SampleRate")?,
            if_filter_bw: node.required_value("IFFilterBW")?,
            freq_center: node.required_value("FreqCenter")?,
            lfm_rate: node.optional_value("LFMRate")?,
            polarization: node.required_value("Polarization")?,
            path_gain: node.optional_value("PathGain")?,
        })
    }
}

impl XmlCodec for TxRcv {
    fn encode(&self, element: &mut Element) -> CphdResult<()> {
        element.add_value("NumTxWFs", &self.tx_wf_parameters.len());
        element.add_list("TxWFParameters", &self.tx_wf_parameters)?;
        element.add_value("NumRcvs", &self.rcv_parameters.len());
        element.add_list("RcvParameters", &self.rcv_parameters)?;
        Ok(())
    }

    fn decode(node: &XmlNode<'_>) -> CphdResult<Self> {
        let tx_wf_parameters = node.list("TxWFParameters")?;
        node.check_count("NumTxWFs", tx_wf_parameters.len())?;
        let rcv_parameters = node.list("RcvParameters")?;
        node.check_count("NumRcvs", rcv_parameters.len())?;
        Ok(Self { tx_wf_parameters, rcv_parameters })
    }
}
